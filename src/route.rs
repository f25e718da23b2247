use dioxus::prelude::*;

use crate::components::Layout;
use crate::pages::{About, Projects, Spin};

#[derive(Clone, Routable, Debug, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
    #[route("/")]
    Spin {},  // Roulette first - users land on the wheel
    #[route("/projects")]
    Projects {},
    #[route("/about")]
    About {},
}
