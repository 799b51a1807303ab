#[derive(Clone, Debug)]
pub(super) enum ListKind {
    Unordered,
    Ordered(u64),
}

impl ListKind {
    /// Marker text for the next item, advancing ordered counters.
    pub(super) fn next_marker(&mut self) -> String {
        match self {
            ListKind::Unordered => "• ".to_string(),
            ListKind::Ordered(n) => {
                let cur = *n;
                *n += 1;
                format!("{cur}. ")
            }
        }
    }
}
