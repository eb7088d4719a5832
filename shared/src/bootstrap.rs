use crate::error::BootstrapError;

/// Identity a race page was entered with. Both fields are non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RaceTicket {
    pub room_id: String,
    pub display_name: String,
}

/// Checks the preconditions for entering a race. No connection may be opened
/// unless this succeeds.
pub fn bootstrap(
    room_id: Option<&str>,
    display_name: Option<&str>,
) -> Result<RaceTicket, BootstrapError> {
    let room_id = room_id
        .filter(|r| !r.is_empty())
        .ok_or(BootstrapError::MissingRoomId)?;
    let display_name = display_name
        .filter(|n| !n.is_empty())
        .ok_or(BootstrapError::MissingDisplayName)?;

    Ok(RaceTicket {
        room_id: room_id.to_string(),
        display_name: display_name.to_string(),
    })
}
