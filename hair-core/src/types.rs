/// Identifier for a strand in a [`crate::field::StrandField`].
///
/// This is an index into `StrandField::strands`, and is only meaningful
/// until the field is rebuilt.
pub type StrandId = usize;

/// Index of a joint along a [`crate::spine::Spine`]; `0` is the root.
pub type JointId = usize;
