use crate::domain::join::JoinResult;
use crate::domain::ports::Navigator;
use tracing::info;

// Hands the join result to the terminal in place of a page navigation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, result: &JoinResult) {
        info!(
            map_id = %result.map_id,
            permissions = ?result.permissions,
            is_guest = result.is_guest,
            "navigating to map"
        );
        println!("{}", describe(result));
    }
}

pub fn describe(result: &JoinResult) -> String {
    let role = if result.is_guest { "guest" } else { "member" };
    format!(
        "Joined \"{}\" ({}) as {role} with {:?} access, {}/{} users",
        result.map_title, result.map_id, result.permissions, result.current_users, result.max_users
    )
}
