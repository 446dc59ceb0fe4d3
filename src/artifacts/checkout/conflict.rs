/// Operation that was refused because of the working tree state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Checkout,
    Merge,
}

impl Operation {
    fn verb(&self) -> &'static str {
        match self {
            Operation::Checkout => "checkout",
            Operation::Merge => "merge",
        }
    }

    fn switching(&self) -> &'static str {
        match self {
            Operation::Checkout => "switch branches",
            Operation::Merge => "merge",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.verb())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictType {
    /// A tracked file with local changes would be replaced or removed
    StaleFile,
    /// A directory holding untracked files would be replaced
    StaleDirectory,
    /// An untracked file sits where a tracked one would be written
    UntrackedOverwritten,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictMessage {
    pub header: String,
    pub footer: String,
}

impl ConflictMessage {
    pub fn new(kind: &ConflictType, operation: &Operation) -> Self {
        let (verb, switching) = (operation.verb(), operation.switching());

        match kind {
            ConflictType::StaleFile => Self {
                header: format!(
                    "Your local changes to the following files would be overwritten by {verb}:"
                ),
                footer: format!("Please commit your changes or stash them before you {switching}."),
            },
            ConflictType::StaleDirectory => Self {
                header: "Updating the following directories would lose untracked files in them:"
                    .to_string(),
                footer: format!("Please move or remove them before you {switching}."),
            },
            ConflictType::UntrackedOverwritten => Self {
                header: format!(
                    "The following untracked working tree files would be overwritten by {verb}:"
                ),
                footer: format!("Please move or remove them before you {switching}."),
            },
        }
    }
}
