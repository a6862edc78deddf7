pub mod class_table;

pub use class_table::{
    render_class_table, write_class_table, ClassTableOptions, CommonNameLabeler, DisplayLabel,
    ScientificLabeler,
};
