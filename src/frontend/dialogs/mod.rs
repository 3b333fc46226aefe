//! Trait-based dialog management
//!
//! Each dialog bundles its state, the action type it can produce, and a
//! render function. The [`show_dialog`] host owns the window lifecycle:
//! nothing is rendered while closed, and transient state is reset when the
//! dialog closes.

use egui::{Context, Ui};

/// What a dialog wants to happen after a render pass
#[derive(Debug, Clone, Default)]
pub enum DialogAction<A> {
    /// Keep the dialog open, nothing to do
    #[default]
    None,
    /// Close the dialog
    Close,
    /// Keep the dialog open and hand an action to the app
    Emit(A),
    /// Close the dialog and hand an action to the app
    CloseAndEmit(A),
}

impl<A> DialogAction<A> {
    fn should_close(&self) -> bool {
        matches!(self, DialogAction::Close | DialogAction::CloseAndEmit(_))
    }

    fn into_action(self) -> Option<A> {
        match self {
            DialogAction::Emit(a) | DialogAction::CloseAndEmit(a) => Some(a),
            _ => None,
        }
    }
}

/// State carried by a dialog across frames
pub trait DialogState {
    /// Drop transient state when the dialog closes. Long-lived state (e.g. a
    /// backing model) stays put.
    fn on_close(&mut self) {}
}

/// A dialog: state, action type, render context
pub trait Dialog {
    type State: DialogState;
    type Action;
    type Context<'a>;

    /// Window title
    fn title() -> &'static str;

    /// Default window size as (width, height); height `None` means auto
    fn default_size() -> (f32, Option<f32>) {
        (400.0, None)
    }

    /// Render the dialog body
    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action>;
}

/// Host a dialog for one frame.
///
/// Renders only while `is_open`; handles close requests and state cleanup.
/// Returns the action the dialog produced, if any.
pub fn show_dialog<D: Dialog>(
    ctx: &Context,
    is_open: &mut bool,
    state: &mut D::State,
    dialog_ctx: D::Context<'_>,
) -> Option<D::Action> {
    if !*is_open {
        return None;
    }

    let (width, height) = D::default_size();
    let mut window = egui::Window::new(D::title())
        .collapsible(false)
        .resizable(true)
        .default_width(width);
    if let Some(h) = height {
        window = window.default_height(h);
    }

    let mut result = DialogAction::None;
    window.show(ctx, |ui| {
        result = D::render(state, dialog_ctx, ui);
    });

    if result.should_close() {
        *is_open = false;
        state.on_close();
    }

    result.into_action()
}

pub mod task_select;

pub use task_select::{TaskSelectContext, TaskSelectDialog, TaskSelectState};
