mod list_input;
mod text_input;

pub(crate) use list_input::ListInput;
pub(crate) use text_input::TextInput;
