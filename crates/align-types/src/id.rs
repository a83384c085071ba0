use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn as_u64(&self) -> u64 {
                self.0
            }

            pub fn to_le_bytes(&self) -> [u8; 8] {
                self.0.to_le_bytes()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a topic (corpus accepting submissions).
    TopicId,
    "topic"
);
entity_id!(
    /// Identifier of a single contributed submission.
    SubmissionId,
    "submission"
);
entity_id!(
    /// Identifier of a submission-topic link, the unit voting operates on.
    LinkId,
    "link"
);
entity_id!(
    /// Identifier of one validator's vote commitment on one link.
    VoteCommitId,
    "vote"
);
entity_id!(
    /// Identifier of an AI validation request.
    RequestId,
    "ai-request"
);
