pub mod cat_file;
pub mod check_ignore;
pub mod hash_object;
pub mod ls_files;
pub mod ls_tree;
pub mod rev_parse;
pub mod show_ref;
