//! Keyword implementations specific to superseded drafts (3 and 4) kept around for dialect
//! dispatch in [`super::get_for_draft`].
pub(crate) mod disallow_draft_3;
pub(crate) mod divisible_by_draft_3;
pub(crate) mod maximum_draft_4;
pub(crate) mod minimum_draft_4;
pub(crate) mod type_draft_4;
