pub mod backward_pass;
