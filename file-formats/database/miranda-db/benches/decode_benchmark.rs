use criterion::{Criterion, criterion_group, criterion_main};
use miranda_db::test_utils::{DatabaseBuilder, EventSpec, SettingsBlob};
use miranda_db::{DbBuffer, DecodeOptions, MirandaDb, contact_offsets};
use std::hint::black_box;

fn create_test_profile(contacts: u32, events_per_contact: u32) -> Vec<u8> {
    let mut builder = DatabaseBuilder::new();

    for i in 0..contacts {
        let contact = builder.contact();
        contact
            .settings(
                SettingsBlob::new()
                    .dword("UIN", 100_000 + i)
                    .ascii("Nick", &format!("contact{i}"))
                    .byte("Status", 1),
            )
            .settings(
                SettingsBlob::new()
                    .ascii("FirstName", "Test")
                    .wchar("About", "benchmark contact"),
            );

        for j in 0..events_per_contact {
            contact.event(EventSpec::message(&format!("message number {j}")).timestamp(j));
        }
    }

    builder.build()
}

fn decode_benchmark(c: &mut Criterion) {
    let data = create_test_profile(500, 20);

    c.bench_function("contact_offsets", |b| {
        let buffer = DbBuffer::from_vec(data.clone());
        b.iter(|| black_box(contact_offsets(&buffer, 44).unwrap()));
    });

    c.bench_function("decode_all_contacts", |b| {
        let db = MirandaDb::from_bytes(data.clone()).unwrap();
        b.iter(|| {
            let count = db.contacts().map(|c| c.unwrap().events.len()).sum::<usize>();
            black_box(count);
        });
    });

    #[cfg(feature = "parallel")]
    c.bench_function("decode_all_contacts_parallel", |b| {
        let buffer = DbBuffer::from_vec(data.clone());
        let options = DecodeOptions::default();
        b.iter(|| {
            black_box(miranda_db::decode_contacts_parallel(&buffer, 44, &options).unwrap());
        });
    });

    c.bench_function("find_contact_by_uin", |b| {
        let db = MirandaDb::from_bytes(data.clone())
            .unwrap()
            .with_options(DecodeOptions::default());
        b.iter(|| black_box(db.find_contacts("UIN", "100250").unwrap().len()));
    });
}

criterion_group!(benches, decode_benchmark);
criterion_main!(benches);
