//! Expression AST nodes

use crate::semantic::{SymbolId, Type};
use crate::Span;
use smol_str::SmolStr;
use std::fmt;

/// An expression with source location and, once annotated, its type
#[derive(Debug, Clone)]
pub struct Expr {
    /// The expression kind
    pub kind: ExprKind,
    /// Source location
    pub span: Span,
    /// Annotated type; unknown until the checker assigns one
    pub ty: Type,
}

/// Structural equality; spans and annotated types are ignored
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// Expression kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer literal
    Constant(i32),

    /// `true` / `false`
    Boolean(bool),

    /// Reference to a bound symbol
    Identifier(SymbolId),

    /// Unary operation: `-x`, `!g`, `rate(c)`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expr>,
    },

    /// Binary operation: `a + b`, `x <= 5`
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: Box<Expr>,
        /// Right operand
        right: Box<Expr>,
    },

    /// Assignment: `x = e`, `x += e`
    Assign {
        /// Operator
        op: AssignOp,
        /// Assigned location
        target: Box<Expr>,
        /// Assigned value
        value: Box<Expr>,
    },

    /// `++x`, `x--`
    Increment {
        /// Operator
        op: IncrementOp,
        /// Updated location
        target: Box<Expr>,
    },

    /// `c ? a : b`
    InlineIf {
        /// Condition
        condition: Box<Expr>,
        /// Value when true
        then_branch: Box<Expr>,
        /// Value when false
        else_branch: Box<Expr>,
    },

    /// `a, b`
    Comma {
        /// Evaluated first
        left: Box<Expr>,
        /// Evaluated last; gives the value
        right: Box<Expr>,
    },

    /// Function call: `f(a, b)`
    Call {
        /// Called function
        callee: Box<Expr>,
        /// Arguments
        args: Vec<Expr>,
    },

    /// Array access: `a[i]`
    Index {
        /// Array expression
        base: Box<Expr>,
        /// Index expression
        index: Box<Expr>,
    },

    /// Member access: `r.f`, `P.x`
    Field {
        /// Record or process expression
        base: Box<Expr>,
        /// Member name
        name: SmolStr,
    },

    /// Literal list: `{1, 2}`, `{ a: 1, b: 2 }`
    List(Vec<ListItem>),

    /// `forall (i : T) body`
    Forall {
        /// Bound variable
        symbol: SymbolId,
        /// Quantified expression
        body: Box<Expr>,
    },
}

/// An entry of a literal list
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Field name for named entries
    pub name: Option<SmolStr>,
    /// Entry value
    pub value: Expr,
}

impl ListItem {
    /// A positional entry
    #[must_use]
    pub fn positional(value: Expr) -> Self {
        Self { name: None, value }
    }

    /// A named entry
    #[must_use]
    pub fn named(name: impl Into<SmolStr>, value: Expr) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `rate`
    Rate,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `<?`
    Min,
    /// `>?`
    Max,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// Operators producing an integer from two values
    #[must_use]
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::Mod
                | Self::BitAnd
                | Self::BitOr
                | Self::BitXor
                | Self::Shl
                | Self::Shr
                | Self::Min
                | Self::Max
        )
    }

    /// Source symbol
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Min => "<?",
            Self::Max => ">?",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `*=`
    Mul,
    /// `/=`
    Div,
    /// `%=`
    Mod,
    /// `&=`
    BitAnd,
    /// `|=`
    BitOr,
    /// `^=`
    BitXor,
    /// `<<=`
    Shl,
    /// `>>=`
    Shr,
}

impl AssignOp {
    /// Source symbol
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
            Self::Mod => "%=",
            Self::BitAnd => "&=",
            Self::BitOr => "|=",
            Self::BitXor => "^=",
            Self::Shl => "<<=",
            Self::Shr => ">>=",
        }
    }
}

/// Increment and decrement operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOp {
    /// `++x`
    PreIncrement,
    /// `x++`
    PostIncrement,
    /// `--x`
    PreDecrement,
    /// `x--`
    PostDecrement,
}

impl IncrementOp {
    /// The prefix forms yield the updated location
    #[must_use]
    pub fn is_prefix(self) -> bool {
        matches!(self, Self::PreIncrement | Self::PreDecrement)
    }
}

impl Expr {
    /// Create a new unannotated expression
    #[must_use]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: Type::unknown(),
        }
    }

    /// Set the source location
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Integer literal
    #[must_use]
    pub fn constant(value: i32) -> Self {
        Self::new(ExprKind::Constant(value), Span::default())
    }

    /// Boolean literal
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::Boolean(value), Span::default())
    }

    /// Symbol reference
    #[must_use]
    pub fn ident(symbol: SymbolId) -> Self {
        Self::new(ExprKind::Identifier(symbol), Span::default())
    }

    /// Unary operation
    #[must_use]
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        let span = operand.span;
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    /// Binary operation
    #[must_use]
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        let span = left.span.merge(right.span);
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    /// Assignment
    #[must_use]
    pub fn assign(op: AssignOp, target: Expr, value: Expr) -> Self {
        let span = target.span.merge(value.span);
        Self::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        )
    }

    /// Increment or decrement
    #[must_use]
    pub fn increment(op: IncrementOp, target: Expr) -> Self {
        let span = target.span;
        Self::new(
            ExprKind::Increment {
                op,
                target: Box::new(target),
            },
            span,
        )
    }

    /// Inline if
    #[must_use]
    pub fn inline_if(condition: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        let span = condition.span.merge(else_branch.span);
        Self::new(
            ExprKind::InlineIf {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        )
    }

    /// Comma expression
    #[must_use]
    pub fn comma(left: Expr, right: Expr) -> Self {
        let span = left.span.merge(right.span);
        Self::new(
            ExprKind::Comma {
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    /// Function call
    #[must_use]
    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        let span = args
            .iter()
            .fold(callee.span, |span, arg| span.merge(arg.span));
        Self::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            span,
        )
    }

    /// Array access
    #[must_use]
    pub fn index(base: Expr, index: Expr) -> Self {
        let span = base.span.merge(index.span);
        Self::new(
            ExprKind::Index {
                base: Box::new(base),
                index: Box::new(index),
            },
            span,
        )
    }

    /// Member access
    #[must_use]
    pub fn field(base: Expr, name: impl Into<SmolStr>) -> Self {
        let span = base.span;
        Self::new(
            ExprKind::Field {
                base: Box::new(base),
                name: name.into(),
            },
            span,
        )
    }

    /// Literal list
    #[must_use]
    pub fn list(items: Vec<ListItem>) -> Self {
        let span = items
            .iter()
            .map(|item| item.value.span)
            .reduce(Span::merge)
            .unwrap_or_default();
        Self::new(ExprKind::List(items), span)
    }

    /// Literal list of positional entries
    #[must_use]
    pub fn positional_list(values: Vec<Expr>) -> Self {
        Self::list(values.into_iter().map(ListItem::positional).collect())
    }

    /// Universal quantification over `symbol`
    #[must_use]
    pub fn forall(symbol: SymbolId, body: Expr) -> Self {
        let span = body.span;
        Self::new(
            ExprKind::Forall {
                symbol,
                body: Box::new(body),
            },
            span,
        )
    }

    /// The literal value of an integer constant
    #[must_use]
    pub fn as_constant(&self) -> Option<i32> {
        match self.kind {
            ExprKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Visit direct subexpressions
    pub fn for_each_child(&self, mut f: impl FnMut(&Expr)) {
        match &self.kind {
            ExprKind::Constant(_) | ExprKind::Boolean(_) | ExprKind::Identifier(_) => {}
            ExprKind::Unary { operand, .. } => f(operand),
            ExprKind::Binary { left, right, .. } | ExprKind::Comma { left, right } => {
                f(left);
                f(right);
            }
            ExprKind::Assign { target, value, .. } => {
                f(target);
                f(value);
            }
            ExprKind::Increment { target, .. } => f(target),
            ExprKind::InlineIf {
                condition,
                then_branch,
                else_branch,
            } => {
                f(condition);
                f(then_branch);
                f(else_branch);
            }
            ExprKind::Call { callee, args } => {
                f(callee);
                args.iter().for_each(f);
            }
            ExprKind::Index { base, index } => {
                f(base);
                f(index);
            }
            ExprKind::Field { base, .. } => f(base),
            ExprKind::List(items) => items.iter().for_each(|item| f(&item.value)),
            ExprKind::Forall { body, .. } => f(body),
        }
    }

    /// Visit direct subexpressions mutably
    pub fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut Expr)) {
        match &mut self.kind {
            ExprKind::Constant(_) | ExprKind::Boolean(_) | ExprKind::Identifier(_) => {}
            ExprKind::Unary { operand, .. } => f(operand),
            ExprKind::Binary { left, right, .. } | ExprKind::Comma { left, right } => {
                f(left);
                f(right);
            }
            ExprKind::Assign { target, value, .. } => {
                f(target);
                f(value);
            }
            ExprKind::Increment { target, .. } => f(target),
            ExprKind::InlineIf {
                condition,
                then_branch,
                else_branch,
            } => {
                f(condition);
                f(then_branch);
                f(else_branch);
            }
            ExprKind::Call { callee, args } => {
                f(callee);
                args.iter_mut().for_each(f);
            }
            ExprKind::Index { base, index } => {
                f(base);
                f(index);
            }
            ExprKind::Field { base, .. } => f(base),
            ExprKind::List(items) => items.iter_mut().for_each(|item| f(&mut item.value)),
            ExprKind::Forall { body, .. } => f(body),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Constant(value) => write!(f, "{value}"),
            ExprKind::Boolean(value) => write!(f, "{value}"),
            ExprKind::Identifier(symbol) => write!(f, "${}", symbol.0),
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Neg => write!(f, "-{operand}"),
                UnaryOp::Not => write!(f, "!{operand}"),
                UnaryOp::Rate => write!(f, "rate({operand})"),
            },
            ExprKind::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
            ExprKind::Assign { op, target, value } => {
                write!(f, "{target} {} {value}", op.symbol())
            }
            ExprKind::Increment { op, target } => match op {
                IncrementOp::PreIncrement => write!(f, "++{target}"),
                IncrementOp::PostIncrement => write!(f, "{target}++"),
                IncrementOp::PreDecrement => write!(f, "--{target}"),
                IncrementOp::PostDecrement => write!(f, "{target}--"),
            },
            ExprKind::InlineIf {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "({condition} ? {then_branch} : {else_branch})"),
            ExprKind::Comma { left, right } => write!(f, "{left}, {right}"),
            ExprKind::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            ExprKind::Index { base, index } => write!(f, "{base}[{index}]"),
            ExprKind::Field { base, name } => write!(f, "{base}.{name}"),
            ExprKind::List(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if let Some(name) = &item.name {
                        write!(f, "{name}: ")?;
                    }
                    write!(f, "{}", item.value)?;
                }
                write!(f, "}}")
            }
            ExprKind::Forall { symbol, body } => write!(f, "forall (${}) {body}", symbol.0),
        }
    }
}
