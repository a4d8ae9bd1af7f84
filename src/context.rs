use derive_more::Display;

/// Identifier of one common table expression within a planning session.
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[display(fmt = "CTEId#{}", _0)]
pub struct CteId(pub u32);

/// Per-statement state shared by the analysis passes.
///
/// Created once per query. Ids handed out here are never reused within the statement, and two
/// statements never share a context.
#[derive(Debug, Default)]
pub struct StatementContext {
    next_cte_id: u32,
}

impl StatementContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_cte_id(&mut self) -> CteId {
        let id = CteId(self.next_cte_id);
        self.next_cte_id += 1;
        id
    }
}
