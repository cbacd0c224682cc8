//! Rendering tests for the terminal alert view.
//!
//! Uses ratatui's TestBackend to render into a virtual buffer and checks the
//! plain text that ends up on screen.

use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use scry_alert::alert::{
    Alert, AlertOptions, AlertServices, FrameEngine, InputSpec, Platform, Pose,
};
use scry_alert::ui::{render_alert, AlertView, TerminalHost};

const TERMINAL_WIDTH: u16 = 80;
const TERMINAL_HEIGHT: u16 = 24;

/// Helper to convert a ratatui Buffer to a plain text string (no ANSI codes).
fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
    let mut output = String::new();
    for y in 0..buffer.area().height {
        for x in 0..buffer.area().width {
            output.push_str(buffer.get(x, y).symbol());
        }
        output.push('\n');
    }
    output
}

fn alert(options: AlertOptions) -> Alert {
    Alert::new(
        options,
        AlertServices::new(
            Rc::new(FrameEngine::new(Duration::from_millis(16))),
            Rc::new(TerminalHost::new()),
        ),
    )
}

fn render(alert: &Alert, view: &AlertView) -> String {
    let backend = TestBackend::new(TERMINAL_WIDTH, TERMINAL_HEIGHT);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| render_alert(f, alert, view)).unwrap();
    buffer_to_string(terminal.backend().buffer())
}

#[test]
fn radio_alert_shows_options_and_buttons() {
    let mut a = alert(
        AlertOptions::new()
            .title("Favorite color")
            .sub_title("Pick one")
            .input(InputSpec::radio().label("Red").value("red"))
            .input(InputSpec::radio().label("Blue").value("blue"))
            .button("Cancel")
            .button("OK"),
    );
    a.radio_click(1);

    let output = render(&a, &AlertView::new());

    assert!(output.contains("Favorite color"));
    assert!(output.contains("Pick one"));
    assert!(output.contains("( ) Red"));
    assert!(output.contains("(•) Blue"));
    assert!(output.contains("[ Cancel ]  [ OK ]"));
}

#[test]
fn checkbox_alert_shows_checked_state() {
    let mut a = alert(
        AlertOptions::new()
            .input(InputSpec::checkbox().label("Cheese"))
            .input(InputSpec::checkbox().label("Olives"))
            .button("OK"),
    );
    a.checkbox_click(0);

    let output = render(&a, &AlertView::new());
    assert!(output.contains("[x] Cheese"));
    assert!(output.contains("[ ] Olives"));
}

#[test]
fn text_inputs_show_placeholder_until_typed() {
    let mut a = alert(
        AlertOptions::new()
            .input(InputSpec::text().name("user").placeholder("Username"))
            .button("Login"),
    );
    let mut view = AlertView::new();
    view.focus_first(&a);

    assert!(render(&a, &view).contains("> Username"));

    for c in "ada".chars() {
        view.handle_key(&mut a, KeyCode::Char(c), KeyModifiers::NONE);
    }
    let output = render(&a, &view);
    assert!(output.contains("> ada"));
    assert!(!output.contains("> Username"));
}

#[test]
fn many_buttons_stack_vertically() {
    let a = alert(AlertOptions::new().button("One").button("Two").button("Three"));
    let output = render(&a, &AlertView::new());

    assert!(!output.contains("[ One ]  [ Two ]"));
    let one = output.lines().position(|l| l.contains("[ One ]")).unwrap();
    let two = output.lines().position(|l| l.contains("[ Two ]")).unwrap();
    let three = output.lines().position(|l| l.contains("[ Three ]")).unwrap();
    assert_eq!((two - one, three - two), (1, 1));
}

#[test]
fn message_is_wrapped_inside_the_box() {
    let a = alert(AlertOptions::new().title("Note").message(
        "This message is long enough that it has to be wrapped across several lines of the alert box.",
    ));
    let output = render(&a, &AlertView::new());

    let message_lines = output
        .lines()
        .filter(|l| l.contains("message") || l.contains("wrapped") || l.contains("box."))
        .count();
    assert!(message_lines >= 2);
}

#[test]
fn ios_mode_uses_rounded_borders() {
    let a = alert(AlertOptions::new().mode(Platform::Ios).title("Rounded"));
    let output = render(&a, &AlertView::new());
    assert!(output.contains('╭'));

    let a = alert(AlertOptions::new().mode(Platform::Md).title("Square"));
    let output = render(&a, &AlertView::new());
    assert!(output.contains('┌'));
}

#[test]
fn scaled_pose_shrinks_the_box() {
    let a = alert(AlertOptions::new().title("Scale"));
    let full = render(&a, &AlertView::new());
    let small = render(
        &a,
        &AlertView {
            focus: None,
            pose: Some(Pose::new(1.0, 0.5)),
        },
    );

    let top_border = |screen: &str| {
        screen
            .lines()
            .find(|l| l.contains('┌'))
            .map(|l| l.chars().filter(|c| *c == '─').count())
            .unwrap_or(0)
    };
    assert!(top_border(&small) < top_border(&full));
}
