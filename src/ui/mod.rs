mod celebration;
mod theme;
mod view;

pub use theme::Theme;
pub use view::CalculatorView;
