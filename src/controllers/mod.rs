mod boot;

pub use boot::BootController;

pub fn init_controllers() -> BootController {
    BootController::new()
}
