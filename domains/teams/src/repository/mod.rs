//! Remote access for the teams domain: the team directory and memberships

pub mod directory;
pub mod memberships;

pub use directory::RemoteTeamDirectory;
pub use memberships::MembershipClient;
