//! Token kinds and the keyword table.
//!
//! Keywords match whole words case-insensitively; the `$`-suffixed function
//! names are single keywords with the suffix included, so `CHR$` is one
//! token while `A$` is an identifier with a type suffix.

/// A lexical token with its original text and 1-based source position.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Original spelling, kept for diagnostics and `DATA` capture.
    pub text: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Numeric literal; the type suffix, if any, was consumed and dropped.
    Number(f64),
    StringLit(String),
    /// Identifier, case-folded, with its type suffix when present.
    Ident { name: String, suffix: Option<char> },
    /// A digit run opening a logical line.
    LineNumber(u16),
    Keyword(Keyword),
    /// `REM` or `'` with the remainder of the line.
    Comment(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Backslash,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    LParen,
    RParen,
    Comma,
    Semicolon,
    Colon,
    Hash,
    Amp,
    Question,
    Newline,
    Eof,
}

/// Every keyword the parser dispatches on, statements and built-in
/// functions alike. Variants ending in `S` are the `$`-suffixed forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    // statements
    All,
    Append,
    As,
    Base,
    Call,
    Chain,
    Clear,
    Close,
    Cls,
    Common,
    Data,
    Def,
    Defdbl,
    Defint,
    Defsng,
    Defstr,
    Delete,
    Dim,
    Else,
    End,
    Erase,
    Error,
    Field,
    Fn,
    For,
    Get,
    Gosub,
    Goto,
    If,
    Input,
    Kill,
    Let,
    Line,
    Lprint,
    Lset,
    Merge,
    Name,
    Next,
    On,
    Open,
    Option,
    Out,
    Output,
    Poke,
    Print,
    Put,
    Random,
    Randomize,
    Read,
    Rem,
    Reset,
    Restore,
    Resume,
    Return,
    Rset,
    Run,
    Step,
    Stop,
    Swap,
    System,
    Then,
    To,
    Tron,
    Troff,
    Using,
    Wait,
    Wend,
    While,
    Width,
    Write,
    // operators
    And,
    Eqv,
    Imp,
    Mod,
    Not,
    Or,
    Xor,
    // functions
    Abs,
    Asc,
    Atn,
    Cdbl,
    ChrS,
    Cint,
    Cos,
    Csng,
    Cvd,
    Cvi,
    Cvs,
    DateS,
    EnvironS,
    Eof,
    ErrorS,
    Exp,
    Fix,
    Fre,
    HexS,
    InkeyS,
    Inp,
    InputS,
    Instr,
    Int,
    LeftS,
    Len,
    Loc,
    Lof,
    Log,
    Lpos,
    MidS,
    MkdS,
    MkiS,
    MksS,
    OctS,
    Peek,
    Pos,
    RightS,
    Rnd,
    Sgn,
    Sin,
    SpaceS,
    Spc,
    Sqr,
    StrS,
    StringS,
    Tab,
    Tan,
    Timer,
    TimeS,
    Usr,
    Val,
    Varptr,
}

/// Whole-word keyword lookup over the case-folded spelling (including any
/// `$` suffix).
pub fn lookup_keyword(word: &str) -> Option<Keyword> {
    use self::Keyword::*;
    Some(match word {
        "all" => All,
        "append" => Append,
        "as" => As,
        "base" => Base,
        "call" => Call,
        "chain" => Chain,
        "clear" => Clear,
        "close" => Close,
        "cls" => Cls,
        "common" => Common,
        "data" => Data,
        "def" => Def,
        "defdbl" => Defdbl,
        "defint" => Defint,
        "defsng" => Defsng,
        "defstr" => Defstr,
        "delete" => Delete,
        "dim" => Dim,
        "else" => Else,
        "end" => End,
        "erase" => Erase,
        "error" => Error,
        "field" => Field,
        "fn" => Fn,
        "for" => For,
        "get" => Get,
        "gosub" => Gosub,
        "goto" => Goto,
        "if" => If,
        "input" => Input,
        "kill" => Kill,
        "let" => Let,
        "line" => Line,
        "lprint" => Lprint,
        "lset" => Lset,
        "merge" => Merge,
        "name" => Name,
        "next" => Next,
        "on" => On,
        "open" => Open,
        "option" => Option,
        "out" => Out,
        "output" => Output,
        "poke" => Poke,
        "print" => Print,
        "put" => Put,
        "random" => Random,
        "randomize" => Randomize,
        "read" => Read,
        "rem" => Rem,
        "reset" => Reset,
        "restore" => Restore,
        "resume" => Resume,
        "return" => Return,
        "rset" => Rset,
        "run" => Run,
        "step" => Step,
        "stop" => Stop,
        "swap" => Swap,
        "system" => System,
        "then" => Then,
        "to" => To,
        "tron" => Tron,
        "troff" => Troff,
        "using" => Using,
        "wait" => Wait,
        "wend" => Wend,
        "while" => While,
        "width" => Width,
        "write" => Write,
        "and" => And,
        "eqv" => Eqv,
        "imp" => Imp,
        "mod" => Mod,
        "not" => Not,
        "or" => Or,
        "xor" => Xor,
        "abs" => Abs,
        "asc" => Asc,
        "atn" => Atn,
        "cdbl" => Cdbl,
        "chr$" => ChrS,
        "cint" => Cint,
        "cos" => Cos,
        "csng" => Csng,
        "cvd" => Cvd,
        "cvi" => Cvi,
        "cvs" => Cvs,
        "date$" => DateS,
        "environ$" => EnvironS,
        "eof" => Eof,
        "error$" => ErrorS,
        "exp" => Exp,
        "fix" => Fix,
        "fre" => Fre,
        "hex$" => HexS,
        "inkey$" => InkeyS,
        "inp" => Inp,
        "input$" => InputS,
        "instr" => Instr,
        "int" => Int,
        "left$" => LeftS,
        "len" => Len,
        "loc" => Loc,
        "lof" => Lof,
        "log" => Log,
        "lpos" => Lpos,
        "mid$" => MidS,
        "mkd$" => MkdS,
        "mki$" => MkiS,
        "mks$" => MksS,
        "oct$" => OctS,
        "peek" => Peek,
        "pos" => Pos,
        "right$" => RightS,
        "rnd" => Rnd,
        "sgn" => Sgn,
        "sin" => Sin,
        "space$" => SpaceS,
        "spc" => Spc,
        "sqr" => Sqr,
        "str$" => StrS,
        "string$" => StringS,
        "tab" => Tab,
        "tan" => Tan,
        "timer" => Timer,
        "time$" => TimeS,
        "usr" => Usr,
        "val" => Val,
        "varptr" => Varptr,
        _ => return None,
    })
}

impl Keyword {
    /// Canonical name the interpreter's built-in dispatch expects, for
    /// keywords that are functions in expression position.
    pub fn function_name(self) -> Option<&'static str> {
        use self::Keyword::*;
        Some(match self {
            Abs => "abs",
            Asc => "asc",
            Atn => "atn",
            Cdbl => "cdbl",
            ChrS => "chr$",
            Cint => "cint",
            Cos => "cos",
            Csng => "csng",
            Cvd => "cvd",
            Cvi => "cvi",
            Cvs => "cvs",
            DateS => "date$",
            EnvironS => "environ$",
            Eof => "eof",
            ErrorS => "error$",
            Exp => "exp",
            Fix => "fix",
            Fre => "fre",
            HexS => "hex$",
            InkeyS => "inkey$",
            Inp => "inp",
            InputS => "input$",
            Instr => "instr",
            Int => "int",
            LeftS => "left$",
            Len => "len",
            Loc => "loc",
            Lof => "lof",
            Log => "log",
            Lpos => "lpos",
            MidS => "mid$",
            MkdS => "mkd$",
            MkiS => "mki$",
            MksS => "mks$",
            OctS => "oct$",
            Peek => "peek",
            Pos => "pos",
            RightS => "right$",
            Rnd => "rnd",
            Sgn => "sgn",
            Sin => "sin",
            SpaceS => "space$",
            Spc => "spc",
            Sqr => "sqr",
            StrS => "str$",
            StringS => "string$",
            Tab => "tab",
            Tan => "tan",
            Timer => "timer",
            TimeS => "time$",
            Usr => "usr",
            Val => "val",
            Varptr => "varptr",
            _ => return None,
        })
    }
}
