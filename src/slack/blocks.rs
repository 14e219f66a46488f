//! Builders for the blocks used by the rota modals.

use super::types::{
    Accessory, ActionElement, Block, InputElement, OptionObject, PlainText, Text,
};

pub fn header(text: &str) -> Block {
    Block::Header {
        text: PlainText::new(text),
    }
}

/// Actions block holding a single button.
pub fn button_row(block_id: &str, text: &str, action_id: &str) -> Block {
    Block::Actions {
        block_id: block_id.to_string(),
        elements: vec![ActionElement::Button {
            text: PlainText::new(text),
            action_id: action_id.to_string(),
            value: None,
        }],
    }
}

/// One entry of an overflow menu.
pub struct OverflowAction<'a> {
    pub name: &'a str,
    pub action: &'a str,
}

/// Section naming an element with an overflow menu next to it.
///
/// The block ID is the element ID, so a click reports which element it targets
/// through `block_id` and which action through the selected option's value.
pub fn overflow_section(
    element_id: &str,
    element_name: &str,
    action_id: &str,
    actions: &[OverflowAction<'_>],
) -> Block {
    let options = actions
        .iter()
        .map(|a| OptionObject {
            text: PlainText::new(a.name),
            value: a.action.to_string(),
        })
        .collect();

    Block::Section {
        block_id: Some(element_id.to_string()),
        text: Text::mrkdwn(element_name),
        accessory: Some(Accessory::Overflow {
            action_id: action_id.to_string(),
            options,
        }),
    }
}

/// Single-line text input. The action ID equals the block ID.
pub fn text_input(block_id: &str, label: &str, hint: &str, value: &str) -> Block {
    Block::Input {
        block_id: block_id.to_string(),
        label: PlainText::new(label),
        element: InputElement::PlainTextInput {
            action_id: block_id.to_string(),
            placeholder: Some(PlainText::new(hint)),
            initial_value: (!value.is_empty()).then(|| value.to_string()),
        },
        optional: false,
    }
}

/// Static select whose option text doubles as its value.
pub fn static_select(block_id: &str, label: &str, initial: &str, options: &[&str]) -> Block {
    let option = |text: &str| OptionObject {
        text: PlainText::new(text),
        value: text.to_string(),
    };

    Block::Input {
        block_id: block_id.to_string(),
        label: PlainText::new(label),
        element: InputElement::StaticSelect {
            action_id: block_id.to_string(),
            options: options.iter().map(|o| option(o)).collect(),
            initial_option: options.contains(&initial).then(|| option(initial)),
        },
        optional: false,
    }
}

/// Multi user picker. Optional, so a rota can be saved without members.
pub fn users_select(block_id: &str, label: &str, initial_users: &[String]) -> Block {
    Block::Input {
        block_id: block_id.to_string(),
        label: PlainText::new(label),
        element: InputElement::MultiUsersSelect {
            action_id: block_id.to_string(),
            initial_users: initial_users.to_vec(),
        },
        optional: true,
    }
}
