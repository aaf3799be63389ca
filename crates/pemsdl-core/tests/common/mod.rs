pub mod pems_server;
