pub mod reply_writer;
