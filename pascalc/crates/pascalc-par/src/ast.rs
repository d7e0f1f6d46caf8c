//! Typed AST node definitions.
//!
//! Node taxonomy grounded in `original_source/syntax_node.h` (`NodeCall`,
//! `NodeBinaryOp`, `NodeUnaryOp`, `NodeIntToRealConv`, `NodeVar`,
//! `NodeArrayAccess`, `NodeRecordAccess`, `StmtAssign`/`Block`/`Expression`/
//! `For`/`While`/`Until`/`If`), represented as a flat enum rather than a
//! class hierarchy.
//!
//! Every node is built with its type and l-value-ness already resolved
//! (type invariants hold at construction and are never revisited);
//! nothing downstream re-derives them.
//!
//! Symbols are owned by the scope that declared them for the lifetime of
//! the compilation unit; rather than thread that lifetime through every
//! node, a variable or call reference captures a small value snapshot of
//! the symbol (`VarRef`/`RoutineRef`) at the point it is resolved. Symbols
//! are never mutated after declaration, so the snapshot never goes stale.

use std::rc::Rc;

use pascalc_sem::{RoutineSig, TypeRef};
use pascalc_util::Span;

/// Where a variable reference's storage lives, with enough detail for the
/// generator to address it without consulting the symbol table again.
#[derive(Debug, Clone)]
pub enum VarRef {
    Global { label: String, ty: TypeRef },
    Local { offset: u32, ty: TypeRef },
    Param { offset: u32, by_ref: bool, ty: TypeRef },
}

impl VarRef {
    pub fn ty(&self) -> &TypeRef {
        match self {
            VarRef::Global { ty, .. } | VarRef::Local { ty, .. } | VarRef::Param { ty, .. } => ty,
        }
    }
}

/// A resolved call target: the routine's label, its parameter shapes in
/// declaration order (the phantom `Result` slot for functions included),
/// and its result type if it is a function.
#[derive(Debug, Clone)]
pub struct RoutineRef {
    pub label: String,
    pub sig: Rc<RoutineSig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Integer `div`.
    Div,
    /// Real `/`; forces both operands to `real`.
    FDiv,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntConst {
        value: i64,
        ty: TypeRef,
        span: Span,
    },
    RealConst {
        value: f64,
        ty: TypeRef,
        span: Span,
    },
    StringConst {
        value: String,
        ty: TypeRef,
        span: Span,
    },
    Var {
        name: String,
        var: VarRef,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        ty: TypeRef,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        ty: TypeRef,
        span: Span,
    },
    /// Inserted by the parser to reconcile a mixed int/real operand pair.
    IntToReal {
        operand: Box<Expr>,
        ty: TypeRef,
        span: Span,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        low: i32,
        ty: TypeRef,
        span: Span,
    },
    Field {
        base: Box<Expr>,
        name: String,
        offset: u32,
        ty: TypeRef,
        span: Span,
    },
    Call {
        routine: RoutineRef,
        args: Vec<Expr>,
        ty: TypeRef,
        span: Span,
    },
    /// The built-in `write`/`writeln` call.
    Write {
        args: Vec<Expr>,
        newline: bool,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntConst { span, .. }
            | Expr::RealConst { span, .. }
            | Expr::StringConst { span, .. }
            | Expr::Var { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::IntToReal { span, .. }
            | Expr::Index { span, .. }
            | Expr::Field { span, .. }
            | Expr::Call { span, .. }
            | Expr::Write { span, .. } => *span,
        }
    }

    pub fn ty(&self) -> &TypeRef {
        match self {
            Expr::IntConst { ty, .. }
            | Expr::RealConst { ty, .. }
            | Expr::StringConst { ty, .. }
            | Expr::Unary { ty, .. }
            | Expr::Binary { ty, .. }
            | Expr::IntToReal { ty, .. }
            | Expr::Index { ty, .. }
            | Expr::Field { ty, .. }
            | Expr::Call { ty, .. } => ty,
            Expr::Var { var, .. } => var.ty(),
            Expr::Write { .. } => panic!("write has no type; it is only valid as a statement"),
        }
    }

    pub fn is_lvalue(&self) -> bool {
        matches!(self, Expr::Var { .. } | Expr::Index { .. } | Expr::Field { .. })
    }

    fn print(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        let kind = self.describe();
        match self {
            Expr::Write { .. } => {
                out.push_str(&format!("{pad}{kind}\n"));
            }
            _ => out.push_str(&format!("{pad}{kind} [{}]\n", self.ty().describe())),
        }
        for child in self.children() {
            child.print(out, indent + 1);
        }
    }

    fn describe(&self) -> String {
        match self {
            Expr::IntConst { value, .. } => format!("IntConst({value})"),
            Expr::RealConst { value, .. } => format!("RealConst({value})"),
            Expr::StringConst { value, .. } => format!("StringConst({value:?})"),
            Expr::Var { name, .. } => format!("Var({name})"),
            Expr::Unary { op, .. } => format!("Unary({op:?})"),
            Expr::Binary { op, .. } => format!("Binary({op:?})"),
            Expr::IntToReal { .. } => "IntToReal".to_string(),
            Expr::Index { .. } => "Index".to_string(),
            Expr::Field { name, .. } => format!("Field(.{name})"),
            Expr::Call { routine, .. } => format!("Call({})", routine.label),
            Expr::Write { newline, .. } => {
                if *newline {
                    "Writeln".to_string()
                } else {
                    "Write".to_string()
                }
            }
        }
    }

    fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::IntConst { .. } | Expr::RealConst { .. } | Expr::StringConst { .. } | Expr::Var { .. } => {
                vec![]
            }
            Expr::Unary { operand, .. } | Expr::IntToReal { operand, .. } => vec![operand],
            Expr::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            Expr::Index { base, index, .. } => vec![base, index],
            Expr::Field { base, .. } => vec![base],
            Expr::Call { args, .. } | Expr::Write { args, .. } => args.iter().collect(),
        }
    }

    /// Pretty-prints this expression, two-space-indented per nesting level.
    pub fn pretty_print(&self) -> String {
        let mut out = String::new();
        self.print(&mut out, 0);
        out
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Assign {
        lhs: Expr,
        rhs: Expr,
        span: Span,
    },
    Block(Vec<Stmt>),
    ExprStmt(Expr),
    For {
        var: String,
        var_ref: VarRef,
        from: Expr,
        to: Expr,
        downto: bool,
        body: Box<Stmt>,
        span: Span,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    RepeatUntil {
        body: Box<Stmt>,
        cond: Expr,
        span: Span,
    },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
}

impl Stmt {
    fn print(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        match self {
            Stmt::Assign { lhs, rhs, .. } => {
                out.push_str(&format!("{pad}Assign\n"));
                lhs.print(out, indent + 1);
                rhs.print(out, indent + 1);
            }
            Stmt::Block(stmts) => {
                out.push_str(&format!("{pad}Block\n"));
                for s in stmts {
                    s.print(out, indent + 1);
                }
            }
            Stmt::ExprStmt(e) => {
                out.push_str(&format!("{pad}ExprStmt\n"));
                e.print(out, indent + 1);
            }
            Stmt::For { var, downto, from, to, body, .. } => {
                let dir = if *downto { "downto" } else { "to" };
                out.push_str(&format!("{pad}For({var}, {dir})\n"));
                from.print(out, indent + 1);
                to.print(out, indent + 1);
                body.print(out, indent + 1);
            }
            Stmt::While { cond, body, .. } => {
                out.push_str(&format!("{pad}While\n"));
                cond.print(out, indent + 1);
                body.print(out, indent + 1);
            }
            Stmt::RepeatUntil { body, cond, .. } => {
                out.push_str(&format!("{pad}RepeatUntil\n"));
                body.print(out, indent + 1);
                cond.print(out, indent + 1);
            }
            Stmt::If { cond, then_branch, else_branch, .. } => {
                out.push_str(&format!("{pad}If\n"));
                cond.print(out, indent + 1);
                then_branch.print(out, indent + 1);
                if let Some(e) = else_branch {
                    e.print(out, indent + 1);
                }
            }
        }
    }

    pub fn pretty_print(&self) -> String {
        let mut out = String::new();
        self.print(&mut out, 0);
        out
    }
}

/// A parsed procedure or function, with its already-resolved signature.
#[derive(Debug, Clone)]
pub struct Routine {
    pub name: String,
    pub label: String,
    pub sig: Rc<RoutineSig>,
    pub body: Stmt,
}

/// A global variable declaration, in declaration order.
#[derive(Debug, Clone)]
pub struct GlobalVar {
    pub label: String,
    pub ty: TypeRef,
}

/// The whole compilation unit: every global, every routine, and the main block.
#[derive(Debug, Clone)]
pub struct Program {
    pub globals: Vec<GlobalVar>,
    pub routines: Vec<Routine>,
    pub main: Stmt,
}
