//! Program representation produced by the front end and executed by the
//! interpreter.
//!
//! Statements and expressions are closed enumerations; the interpreter
//! pattern-matches over them instead of dispatching virtually. Identifier
//! references arrive here already normalized: lowercased, with the type
//! resolved from suffix, `DEFtype` range or the `SINGLE` default.

use std::collections::HashMap;

use crate::io::FileMode;
use crate::value::VarType;

/// A normalized variable reference: lowercase base name plus resolved type.
///
/// `a`, `a%`, `a!`, `a#` and `a$` are five independent cells, so storage is
/// keyed by base name *and* type ([`key`](#method.key)); under `DEFINT A`
/// a bare `a` and an explicit `a%` share one cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub name: String,
    pub vtype: VarType,
}

impl VarRef {
    pub fn new(name: impl Into<String>, vtype: VarType) -> VarRef {
        VarRef {
            name: name.into(),
            vtype,
        }
    }

    /// Storage key: base name with the resolved suffix appended.
    pub fn key(&self) -> String {
        format!("{}{}", self.name, self.vtype.suffix())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Xor,
    Eqv,
    Imp,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    StringLit(String),
    Var(VarRef),
    /// Subscripted reference; auto-dimensions to upper bound 10 per axis on
    /// first use without `DIM`.
    Element(VarRef, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `FN`-call to a user function (`FNA(x)` and `FN A(x)` both call
    /// `fna`; the reference's type is the function's result type).
    UserFn(VarRef, Vec<Expr>),
    /// Built-in function call, dispatched by canonical lowercase name
    /// (`"chr$"`, `"abs"`, ...).
    Call(String, Vec<Expr>),
}

/// Assignment / input target.
#[derive(Clone, Debug, PartialEq)]
pub enum LValue {
    Var(VarRef),
    Element(VarRef, Vec<Expr>),
}

impl LValue {
    pub fn var(&self) -> &VarRef {
        match self {
            LValue::Var(v) => v,
            LValue::Element(v, _) => v,
        }
    }
}

/// One `PRINT` list entry: an optional expression followed by the separator
/// written after it. A `None` separator is only valid on the last entry and
/// means the statement ends the line.
#[derive(Clone, Debug, PartialEq)]
pub struct PrintItem {
    pub expr: Option<Expr>,
    pub sep: Option<PrintSep>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrintSep {
    /// `;` — no gap.
    Semicolon,
    /// `,` — advance to the next 14-column zone.
    Comma,
    /// Two expressions with nothing between them — one space.
    Adjacent,
}

/// `IF` branch: a bare line number (`THEN 100`) or nested statements.
#[derive(Clone, Debug, PartialEq)]
pub enum Branch {
    Line(u16),
    Stmts(Vec<Statement>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResumeMode {
    /// `RESUME` / `RESUME 0` — re-execute the faulting statement.
    Retry,
    /// `RESUME NEXT`.
    Next,
    /// `RESUME n`.
    Line(u16),
}

/// `OPEN` mode: the modern form names it with a keyword, the classic form
/// evaluates a string whose first letter selects the mode at run time.
#[derive(Clone, Debug, PartialEq)]
pub enum OpenMode {
    Keyword(FileMode),
    Classic(Expr),
}

/// A literal from a `DATA` statement. Unquoted items that lex as numbers
/// are numeric; everything else is kept as its textual form.
#[derive(Clone, Debug, PartialEq)]
pub enum DataItem {
    Number(f64),
    Str(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Print {
        file: Option<Expr>,
        using: Option<Expr>,
        items: Vec<PrintItem>,
        printer: bool,
    },
    Input {
        file: Option<Expr>,
        prompt: Option<String>,
        suppress_mark: bool,
        vars: Vec<LValue>,
    },
    LineInput {
        file: Option<Expr>,
        prompt: Option<String>,
        var: LValue,
    },
    Let {
        target: LValue,
        value: Expr,
    },
    If {
        cond: Expr,
        then_branch: Branch,
        else_branch: Option<Branch>,
    },
    For {
        var: VarRef,
        from: Expr,
        to: Expr,
        step: Option<Expr>,
    },
    Next {
        vars: Vec<VarRef>,
    },
    While {
        cond: Expr,
    },
    Wend,
    Goto(u16),
    Gosub(u16),
    Return {
        line: Option<u16>,
    },
    OnGoto {
        expr: Expr,
        targets: Vec<u16>,
        gosub: bool,
    },
    OnErrorGoto {
        line: u16,
        gosub: bool,
    },
    Data(Vec<DataItem>),
    Read(Vec<LValue>),
    Restore(Option<u16>),
    Dim(Vec<(VarRef, Vec<Expr>)>),
    DefFn {
        name: VarRef,
        params: Vec<VarRef>,
        body: Expr,
    },
    /// `DEFINT`/`DEFSNG`/`DEFDBL`/`DEFSTR`; the ranges take effect in the
    /// parser's first pass, execution is a no-op.
    DefType {
        vtype: VarType,
        ranges: Vec<(char, char)>,
    },
    End,
    Stop,
    Cls,
    Rem(String),
    Swap(LValue, LValue),
    Erase(Vec<VarRef>),
    Clear,
    OptionBase(Expr),
    Randomize(Option<Expr>),
    Tron,
    Troff,
    Width {
        printer: bool,
        value: Expr,
    },
    Poke(Expr, Expr),
    Out(Expr, Expr),
    Wait(Expr, Expr, Option<Expr>),
    CallSub {
        name: String,
        args: Vec<Expr>,
    },
    ErrorStmt(Expr),
    Resume(ResumeMode),
    Open {
        file: Expr,
        mode: OpenMode,
        number: Expr,
        record_len: Option<Expr>,
    },
    Close(Vec<Expr>),
    Field {
        number: Expr,
        fields: Vec<(Expr, VarRef)>,
    },
    Get {
        number: Expr,
        record: Option<Expr>,
    },
    Put {
        number: Expr,
        record: Option<Expr>,
    },
    LSet {
        var: VarRef,
        value: Expr,
    },
    RSet {
        var: VarRef,
        value: Expr,
    },
    Write {
        file: Option<Expr>,
        items: Vec<Expr>,
    },
    Chain {
        merge: bool,
        file: Expr,
        line: Option<Expr>,
        all: bool,
    },
    Common(Vec<VarRef>),
    MidAssign {
        target: LValue,
        start: Expr,
        len: Option<Expr>,
        value: Expr,
    },
    Kill(Expr),
    NameAs {
        from: Expr,
        to: Expr,
    },
    Merge(Expr),
    Run {
        file: Option<Expr>,
        line: Option<u16>,
        keep_variables: bool,
    },
    Reset,
}

/// One numbered source line.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramLine {
    pub number: u16,
    pub statements: Vec<Statement>,
    /// Original text, kept for diagnostics and `MERGE` bookkeeping.
    pub source: String,
}

/// A parsed program plus the `DEFtype` map the parser collected in its
/// first pass (copied into the runtime on load).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub lines: Vec<ProgramLine>,
    pub deftype: HashMap<char, VarType>,
}

impl Program {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
