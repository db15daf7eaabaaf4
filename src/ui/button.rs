//! Tappable button render model.

use super::{Haptics, Style};

/// Visual state of a [`Button`]. Loading wins over disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Normal,
    Disabled,
    Loading,
}

/// What the host draws for a button.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub state: ButtonState,
    /// Hidden while the spinner is shown
    pub label: Option<String>,
    pub show_spinner: bool,
    pub style: Style,
    pub text_style: Style,
}

/// Tappable button props.
#[derive(Default)]
pub struct Button {
    pub label: String,
    pub on_press: Option<Box<dyn Fn() + Send + Sync>>,
    pub style: Style,
    pub text_style: Style,
    pub loading: bool,
    pub disabled: bool,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn on_press(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_press = Some(Box::new(f));
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn state(&self) -> ButtonState {
        if self.loading {
            ButtonState::Loading
        } else if self.disabled {
            ButtonState::Disabled
        } else {
            ButtonState::Normal
        }
    }

    pub fn render(&self) -> ButtonView {
        let state = self.state();
        ButtonView {
            state,
            label: (state != ButtonState::Loading).then(|| self.label.clone()),
            show_spinner: state == ButtonState::Loading,
            style: self.style.clone(),
            text_style: self.text_style.clone(),
        }
    }

    /// Handle a tap. Returns whether the press went through.
    ///
    /// Loading and disabled buttons swallow the tap: no haptic, no callback.
    pub fn press(&self, haptics: &dyn Haptics) -> bool {
        if self.state() != ButtonState::Normal {
            return false;
        }

        haptics.impact_light();
        if let Some(on_press) = &self.on_press {
            on_press();
        }
        true
    }
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("label", &self.label)
            .field("state", &self.state())
            .field("has_on_press", &self.on_press.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockHaptics;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_button(count: &Arc<AtomicUsize>) -> Button {
        let count = count.clone();
        Button::new("Send money").on_press(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn press_fires_light_haptic_and_callback_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut haptics = MockHaptics::new();
        haptics.expect_impact_light().times(1).return_const(());
        haptics.expect_selection().never();

        assert!(counting_button(&count).press(&haptics));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn loading_and_disabled_swallow_presses() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut haptics = MockHaptics::new();
        haptics.expect_impact_light().never();

        assert!(!counting_button(&count).loading(true).press(&haptics));
        assert!(!counting_button(&count).disabled(true).press(&haptics));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn loading_takes_precedence_over_disabled() {
        let button = Button::new("Pay").loading(true).disabled(true);
        let view = button.render();

        assert_eq!(view.state, ButtonState::Loading);
        assert!(view.show_spinner);
        assert_eq!(view.label, None);
    }

    #[test]
    fn press_without_callback_still_succeeds() {
        let mut haptics = MockHaptics::new();
        haptics.expect_impact_light().times(1).return_const(());

        assert!(Button::new("Ok").press(&haptics));
    }

    #[test]
    fn styles_pass_through() {
        let mut button = Button::new("Ok").disabled(true);
        button
            .style
            .insert("backgroundColor".into(), "#10b981".into());

        let view = button.render();
        assert_eq!(view.state, ButtonState::Disabled);
        assert_eq!(view.label.as_deref(), Some("Ok"));
        assert_eq!(view.style["backgroundColor"], "#10b981");
    }
}
