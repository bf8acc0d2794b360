pub mod card;
pub mod charts;
pub mod confirm;
pub mod hints;
pub mod money;
pub mod tabs;
pub mod toast;
