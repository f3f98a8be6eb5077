pub mod cat_file;
pub mod commit_tree;
pub mod hash_object;
pub mod ls_files;
pub mod ls_tree;
pub mod write_tree;
