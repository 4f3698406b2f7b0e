use std::fmt::Formatter;

use serde::{Deserialize, Serialize};

/// A procedure body as handed to the optimizer: a name and its statements in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableName {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelName(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Int(i64),
    Bool(bool),
    Str(String),
    Nil,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rvalue {
    Var(VariableName),
    Lit(Literal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Var(VariableName),
    Lit(Literal),
    Bin {
        op: String,
        left: Rvalue,
        right: Rvalue,
    },
    Unary {
        op: String,
        operand: Rvalue,
    },
    Call {
        name: String,
        args: Vec<Rvalue>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    Label(Label),
    Goto(Goto),
    Branch(Branch),
    AssignVar(AssignVar),
    Eval(Eval),
    Return(Return),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: LabelName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goto {
    pub label: LabelName,
}

/// A two-way conditional jump.
///
/// Inside a control-flow graph the targets are meaningless: the outgoing edges of the
/// branch block carry that information. They become valid again on linearization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub cond: VariableName,
    pub iftrue: LabelName,
    pub iffalse: LabelName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignVar {
    pub lhs: VariableName,
    #[serde(default)]
    pub is_ref: bool,
    pub rhs: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eval {
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Return {
    pub value: Rvalue,
}

impl VariableName {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: None,
        }
    }

    pub fn with_version(name: &str, version: u32) -> Self {
        Self {
            name: name.to_string(),
            version: Some(version),
        }
    }

    pub fn in_ssa(&self) -> bool {
        self.version.is_some()
    }
}

impl LabelName {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl Rvalue {
    fn collect_vars<'a>(&'a self, vars: &mut Vec<&'a VariableName>) {
        if let Rvalue::Var(v) = self {
            vars.push(v);
        }
    }

    fn remap<F: FnMut(VariableName) -> VariableName>(self, f: &mut F) -> Self {
        match self {
            Rvalue::Var(v) => Rvalue::Var(f(v)),
            Rvalue::Lit(l) => Rvalue::Lit(l),
        }
    }
}

impl Expr {
    fn collect_uses<'a>(&'a self, vars: &mut Vec<&'a VariableName>) {
        match self {
            Expr::Var(v) => vars.push(v),
            Expr::Lit(_) => (),
            Expr::Bin { left, right, .. } => {
                left.collect_vars(vars);
                right.collect_vars(vars);
            }
            Expr::Unary { operand, .. } => operand.collect_vars(vars),
            Expr::Call { args, .. } => {
                for a in args {
                    a.collect_vars(vars);
                }
            }
        }
    }

    fn remap_uses<F: FnMut(VariableName) -> VariableName>(self, f: &mut F) -> Self {
        match self {
            Expr::Var(v) => Expr::Var(f(v)),
            Expr::Lit(l) => Expr::Lit(l),
            Expr::Bin { op, left, right } => Expr::Bin {
                op,
                left: left.remap(f),
                right: right.remap(f),
            },
            Expr::Unary { op, operand } => Expr::Unary {
                op,
                operand: operand.remap(f),
            },
            Expr::Call { name, args } => Expr::Call {
                name,
                args: args.into_iter().map(|a| a.remap(f)).collect(),
            },
        }
    }
}

impl Branch {
    pub fn remap_uses<F: FnMut(VariableName) -> VariableName>(self, f: &mut F) -> Self {
        Self {
            cond: f(self.cond),
            ..self
        }
    }
}

impl Statement {
    /// `lhs = rhs;` where both sides are plain variables.
    pub fn copy(lhs: VariableName, rhs: VariableName) -> Self {
        Statement::AssignVar(AssignVar {
            lhs,
            is_ref: false,
            rhs: Expr::Var(rhs),
        })
    }

    pub fn label(name: &str) -> Self {
        Statement::Label(Label {
            name: LabelName::new(name),
        })
    }

    pub fn goto(label: &str) -> Self {
        Statement::Goto(Goto {
            label: LabelName::new(label),
        })
    }

    pub fn branch(cond: VariableName, iftrue: &str, iffalse: &str) -> Self {
        Statement::Branch(Branch {
            cond,
            iftrue: LabelName::new(iftrue),
            iffalse: LabelName::new(iffalse),
        })
    }

    pub fn uses(&self) -> Vec<&VariableName> {
        let mut vars = Vec::new();
        match self {
            Statement::Label(_) | Statement::Goto(_) => (),
            Statement::Branch(b) => vars.push(&b.cond),
            Statement::AssignVar(a) => a.rhs.collect_uses(&mut vars),
            Statement::Eval(e) => e.expr.collect_uses(&mut vars),
            Statement::Return(r) => r.value.collect_vars(&mut vars),
        }
        vars
    }

    pub fn defs(&self) -> Vec<&VariableName> {
        match self {
            Statement::AssignVar(a) => vec![&a.lhs],
            _ => Vec::new(),
        }
    }

    /**
     * Rewrite every variable read by this statement with `f`.
     * Definitions are left alone.
     */
    pub fn remap_uses<F: FnMut(VariableName) -> VariableName>(self, f: &mut F) -> Self {
        match self {
            Statement::Label(_) | Statement::Goto(_) => self,
            Statement::Branch(b) => Statement::Branch(b.remap_uses(f)),
            Statement::AssignVar(a) => Statement::AssignVar(AssignVar {
                rhs: a.rhs.remap_uses(f),
                ..a
            }),
            Statement::Eval(e) => Statement::Eval(Eval {
                expr: e.expr.remap_uses(f),
            }),
            Statement::Return(r) => Statement::Return(Return {
                value: r.value.remap(f),
            }),
        }
    }

    /**
     * Rewrite every variable written by this statement with `f`.
     */
    pub fn remap_defs<F: FnMut(VariableName) -> VariableName>(self, f: &mut F) -> Self {
        match self {
            Statement::AssignVar(a) => Statement::AssignVar(AssignVar {
                lhs: f(a.lhs),
                ..a
            }),
            _ => self,
        }
    }

    /// Labels this statement jumps to. A label declaration is not a reference.
    pub fn label_refs(&self) -> Vec<&LabelName> {
        match self {
            Statement::Goto(g) => vec![&g.label],
            Statement::Branch(b) => vec![&b.iftrue, &b.iffalse],
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for Procedure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        writeln!(f, "procedure {} {{", self.name)?;
        for s in &self.statements {
            writeln!(f, "    {}", s)?;
        }
        f.write_str("}")
    }
}

impl std::fmt::Display for VariableName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self.version {
            Some(v) => write!(f, "{}_{}", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}

impl std::fmt::Display for LabelName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Nil => f.write_str("nil"),
        }
    }
}

impl std::fmt::Display for Rvalue {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Rvalue::Var(v) => write!(f, "{}", v),
            Rvalue::Lit(l) => write!(f, "{}", l),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Expr::Var(v) => write!(f, "{}", v),
            Expr::Lit(l) => write!(f, "{}", l),
            Expr::Bin { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Expr::Unary { op, operand } => write!(f, "{}{}", op, operand),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "if ({}) goto {}; else goto {};",
            self.cond, self.iftrue, self.iffalse
        )
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Statement::Label(l) => write!(f, "{}:", l.name),
            Statement::Goto(g) => write!(f, "goto {};", g.label),
            Statement::Branch(b) => write!(f, "{}", b),
            Statement::AssignVar(a) if a.is_ref => write!(f, "{} =& {};", a.lhs, a.rhs),
            Statement::AssignVar(a) => write!(f, "{} = {};", a.lhs, a.rhs),
            Statement::Eval(e) => write!(f, "{};", e.expr),
            Statement::Return(r) => write!(f, "return {};", r.value),
        }
    }
}
