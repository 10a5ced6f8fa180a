use aliri_braid::braid;

/// actinia user's username.
#[braid(serde)]
pub struct Username;

/// Server-assigned identifier of an asynchronous resource,
/// e.g. `resource_id-573cdb12-2d35-4bf1-8f0b-61443ea07d25`
#[braid(serde)]
pub struct ResourceId;

/// Owner of a resource as reported by the server.
#[braid(serde)]
pub struct UserId;

/// Absolute URL from which the state of a job can be polled.
#[braid(serde)]
pub struct StatusUrl;
