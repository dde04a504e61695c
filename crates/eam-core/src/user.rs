//! The operator capturing assets.

use serde::{Deserialize, Serialize};

/// Roles allowed to refresh a location fix that has already been captured.
pub const ELEVATED_ROLES: [&str; 2] = ["Admin", "Super Admin"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
  pub user_name:     String,
  pub role:          String,
  /// Site the operator is working from; distinct from an asset's location.
  pub location_name: String,
}

impl UserContext {
  pub fn is_elevated(&self) -> bool { ELEVATED_ROLES.contains(&self.role.as_str()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(role: &str) -> UserContext {
    UserContext {
      user_name:     "John Smith".into(),
      role:          role.into(),
      location_name: "Warehouse A - North Wing".into(),
    }
  }

  #[test]
  fn only_admin_roles_are_elevated() {
    assert!(user("Admin").is_elevated());
    assert!(user("Super Admin").is_elevated());
    assert!(!user("Field Technician").is_elevated());
    assert!(!user("admin").is_elevated());
  }
}
