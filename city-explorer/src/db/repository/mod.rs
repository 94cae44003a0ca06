mod records;

pub use records::RecordRepository;
