//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker type describing an entity submission.
#[derive(Clone, Copy, Debug)]
pub struct Submission;

/// Marker type describing an entity completion.
#[derive(Clone, Copy, Debug)]
pub struct Completion;

/// Marker type describing an entity scheduling.
#[derive(Clone, Copy, Debug)]
pub struct Scheduling;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing an entity viewing.
#[derive(Clone, Copy, Debug)]
pub struct Viewing;
