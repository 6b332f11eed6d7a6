use std::fmt::Display;

/// An admission gate. Each gate carries its own wake signal, broadcast every
/// time the gate is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// The factory is open to visitors (buyers and thieves).
    Visitors,
    /// The returning service accepts company buyers' returns.
    Returns,
}

impl Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::Visitors => write!(f, "visitors"),
            Gate::Returns => write!(f, "returns"),
        }
    }
}
