pub mod pseudo;
