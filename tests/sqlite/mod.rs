mod compose;
mod default_sort;
mod mapping;
mod scenario;
mod tree;
