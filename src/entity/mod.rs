pub mod datalog;
