// ABOUTME: Command module aggregator for the kubectl-setimg CLI.
// ABOUTME: Re-exports the tags, list, interactive, and set-image handlers.

mod interactive;
mod list;
mod set_image;
mod tags;

pub use interactive::select_update;
pub use list::list_containers;
pub use set_image::set_image;
pub use tags::show_tags;
