pub mod dashboard;
pub mod detail;
pub mod login;

pub use dashboard::DashboardScreen;
pub use detail::DetailScreen;
pub use login::LoginScreen;

/// The mounted screen. Each one owns its fetched data; nothing is shared
/// between screens.
#[derive(Debug)]
pub enum Screen {
    Login(LoginScreen),
    Dashboard(DashboardScreen),
    Detail(DetailScreen),
}
