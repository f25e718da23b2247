mod add_project_form;
mod layout;
mod project_card;
mod wallet_button;

pub use add_project_form::AddProjectForm;
pub use layout::Layout;
pub use project_card::ProjectCard;
pub use wallet_button::WalletButton;
