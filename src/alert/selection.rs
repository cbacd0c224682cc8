//! Radio and checkbox toggle semantics over the canonical input list.
//!
//! Both operations return a new list; the caller's slice is never mutated.
//! An out-of-range index leaves the list unchanged and runs no callback.

use super::input::CanonicalInput;

/// Select the radio option at `index`, unchecking every other input.
///
/// Returns the updated list and the id of the now active option. The option's
/// callback runs after the selection has been committed.
pub fn select_radio(
    inputs: &[CanonicalInput],
    index: usize,
) -> (Vec<CanonicalInput>, Option<String>) {
    let updated: Vec<CanonicalInput> = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| CanonicalInput {
            checked: i == index,
            ..input.clone()
        })
        .collect();

    let Some(selected) = updated.get(index) else {
        return (inputs.to_vec(), None);
    };
    let active_id = selected.id.clone();
    selected.notify();

    (updated, Some(active_id))
}

/// Flip the checkbox at `index`; every other input is left as is.
pub fn toggle_checkbox(inputs: &[CanonicalInput], index: usize) -> Vec<CanonicalInput> {
    let mut updated = inputs.to_vec();
    if let Some(input) = updated.get_mut(index) {
        input.checked = !input.checked;
        input.notify();
    }
    updated
}
