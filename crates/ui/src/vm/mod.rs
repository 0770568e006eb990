mod markdown_vm;
mod mock_test_vm;
mod result_vm;
mod time_fmt;

pub use markdown_vm::{markdown_excerpt, markdown_to_html, sanitize_html};
pub use mock_test_vm::{
    AttemptVm, OptionVm, PaletteItemVm, QuestionVm, SessionHeaderVm, format_time_spent,
    header_vm, palette, question_vm,
};
pub use result_vm::{ResultRowVm, map_result_rows};
pub use time_fmt::format_date;
