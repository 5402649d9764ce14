pub mod mongo;

pub use mongo::MongoAccountRepository;
