/// Expression tree. `at` fields are byte offsets used for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Lit(Lit),
    Var {
        name: String,
        at: usize,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        at: usize,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        at: usize,
    },
    /// `cond ? then : otherwise`; only the chosen branch is evaluated.
    Cond {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
        at: usize,
    },
    Call {
        func: String,
        args: Vec<Expr>,
        at: usize,
    },
    /// `base.name`
    Attr {
        base: Box<Expr>,
        name: String,
        at: usize,
    },
    /// `base[rows, cols, chans]`
    Index {
        base: Box<Expr>,
        indices: Vec<IndexArg>,
        at: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Lit {
    F64(f64),
    Bool(bool),
}

/// One axis of an index expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum IndexArg {
    At(Expr),
    Slice {
        start: Option<Expr>,
        stop: Option<Expr>,
        step: Option<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stmt {
    /// `name = value`
    Assign { name: String, value: Expr },
    /// `name[indices] = value`
    IndexAssign {
        name: String,
        indices: Vec<IndexArg>,
        value: Expr,
        at: usize,
    },
    /// Bare expression evaluated for its effect.
    Expr(Expr),
}

impl Expr {
    /// First call (in source order) whose name `known` rejects.
    pub(crate) fn find_unknown_call(&self, known: &dyn Fn(&str) -> bool) -> Option<(usize, &str)> {
        match self {
            Expr::Lit(_) | Expr::Var { .. } => None,
            Expr::Unary { expr, .. } => expr.find_unknown_call(known),
            Expr::Binary { left, right, .. } => left
                .find_unknown_call(known)
                .or_else(|| right.find_unknown_call(known)),
            Expr::Cond {
                cond,
                then,
                otherwise,
                ..
            } => cond
                .find_unknown_call(known)
                .or_else(|| then.find_unknown_call(known))
                .or_else(|| otherwise.find_unknown_call(known)),
            Expr::Call { func, args, at } => {
                if !known(func) {
                    return Some((*at, func.as_str()));
                }
                args.iter().find_map(|a| a.find_unknown_call(known))
            }
            Expr::Attr { base, .. } => base.find_unknown_call(known),
            Expr::Index { base, indices, .. } => base
                .find_unknown_call(known)
                .or_else(|| find_in_indices(indices, known)),
        }
    }
}

impl Stmt {
    pub(crate) fn find_unknown_call(&self, known: &dyn Fn(&str) -> bool) -> Option<(usize, &str)> {
        match self {
            Stmt::Assign { value, .. } | Stmt::Expr(value) => value.find_unknown_call(known),
            Stmt::IndexAssign { indices, value, .. } => {
                find_in_indices(indices, known).or_else(|| value.find_unknown_call(known))
            }
        }
    }
}

fn find_in_indices<'a>(
    indices: &'a [IndexArg],
    known: &dyn Fn(&str) -> bool,
) -> Option<(usize, &'a str)> {
    indices.iter().find_map(|arg| match arg {
        IndexArg::At(e) => e.find_unknown_call(known),
        IndexArg::Slice { start, stop, step } => [start, stop, step]
            .into_iter()
            .flatten()
            .find_map(|e| e.find_unknown_call(known)),
    })
}
