//! Centralized limits and thresholds.
//!
//! The core never loops unboundedly: these constants bound recursive
//! traversal and fresh-identifier generation so that pathological input
//! fails with a diagnostic rather than overflowing the stack or running
//! forever.

/// Maximum recursion depth for `eval_expr`'s worklist processing and for
/// `fold_type`'s structural walk. Chosen generously above any realistic
/// hand-written Lustre node; exceeding it means the type/expression is
/// almost certainly self-referential in a way the parser should not have
/// produced.
pub const MAX_EXPR_RECURSION_DEPTH: usize = 512;

/// Maximum number of fresh auxiliary variables (`__abs.k`) a single node may
/// introduce. This bounds pathological `pre (pre (pre ...))` nesting.
pub const MAX_FRESH_VARS_PER_NODE: usize = 1_000_000;

/// Maximum number of equations a single node may carry before the
/// dependency sorter refuses to run, to avoid quadratic blowups on
/// accidentally enormous generated models.
pub const MAX_EQUATIONS_PER_NODE: usize = 1_000_000;
