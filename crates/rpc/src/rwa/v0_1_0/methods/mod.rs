mod build;
mod read;
