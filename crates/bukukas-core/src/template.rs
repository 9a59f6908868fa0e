//! Sample accounts behind `/api/template`

use rust_decimal::Decimal;

use crate::models::{Account, Transaction};

/// Illustrative ledgers showing the expected header layout
pub fn sample_accounts() -> Vec<Account> {
    let rp = |n: i64| Decimal::new(n, 0);

    vec![
        Account::new("Kas Kecil").with_transactions(vec![
            Transaction::new("2024-09-02", "Saldo awal").with_receipt("Modal", rp(2_000_000)),
            Transaction::new("2024-09-05", "Pembelian alat tulis").with_expense("ATK", rp(150_000)),
            Transaction::new("2024-09-12", "Jasa servis komputer").with_receipt("Jasa", rp(750_000)),
            Transaction::new("2024-09-20", "Bayar listrik")
                .with_expense("Listrik", rp(425_000))
                .with_expense("Administrasi", rp(2_500)),
        ]),
        Account::new("Bank").with_transactions(vec![
            Transaction::new("2024-09-01", "Setoran awal").with_receipt("Modal", rp(10_000_000)),
            Transaction::new("2024-09-30", "Bunga bank").with_receipt("Bunga", rp(12_500)),
            Transaction::new("2024-09-30", "Biaya administrasi").with_expense("Administrasi", rp(15_000)),
        ]),
    ]
}
