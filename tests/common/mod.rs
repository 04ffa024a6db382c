#![allow(dead_code)]

pub mod local_group;
