//! Clause fragments.
//!
//! A fragment is one template call's output: a SQL snippet containing the
//! dialect-neutral [`PARAM_TOKEN`] plus the ordered parameter slice for
//! exactly that snippet. Fragments are appended to the builder together
//! with their parameters in the same call, which is what keeps the
//! parameter list aligned with the token order by construction.
//!
//! WHERE fragments carry an explicit leading-connective tag instead of a
//! baked-in `AND `/`OR ` prefix; the first fragment of any (sub)clause is
//! rendered bare and the rest are rendered behind their tag.

use quell_core::Value;

/// The dialect-neutral placeholder token emitted by every template.
///
/// Concrete markers (`?` or `$n`) are rendered exactly once, by the
/// finalizer, at execution time.
pub const PARAM_TOKEN: &str = "$?";

/// The boolean connective a WHERE fragment is joined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    /// The rendered prefix, including surrounding spaces.
    pub const fn prefix(self) -> &'static str {
        match self {
            Connective::And => " AND ",
            Connective::Or => " OR ",
        }
    }
}

/// A rendered SQL snippet plus its ordered parameter slice.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// How this fragment joins the preceding predicate. Ignored when the
    /// fragment is first in its (sub)clause, or when it is not a WHERE
    /// fragment at all (joins).
    pub connective: Connective,
    /// The SQL snippet, containing [`PARAM_TOKEN`] placeholders.
    pub sql: String,
    /// The parameters bound by this snippet, in token order.
    pub params: Vec<Value>,
}

impl Fragment {
    /// Create a fragment with an explicit connective.
    pub fn new(connective: Connective, sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            connective,
            sql: sql.into(),
            params,
        }
    }

    /// Create a fragment whose connective is irrelevant (joins, raw
    /// select parts).
    pub fn plain(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self::new(Connective::And, sql, params)
    }
}

/// Render a predicate list: the first fragment bare, the rest behind
/// their connective. Returns the clause body and the concatenated
/// parameters in left-to-right order.
pub fn render_predicates(fragments: &[Fragment]) -> (String, Vec<Value>) {
    let mut sql = String::new();
    let mut params = Vec::new();
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            sql.push_str(fragment.connective.prefix());
        }
        sql.push_str(&fragment.sql);
        params.extend(fragment.params.iter().cloned());
    }
    (sql, params)
}
