#![no_main]
use libfuzzer_sys::fuzz_target;
use libbookie::classify::fees::KeywordFees;
use libbookie::{
    scan, BankContext, Classifier, Config, Direction, DirectiveGenerator, OpenRegistry,
    Transaction,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let discovered = scan(s);
        let existing = OpenRegistry::load(s);
        if let Ok(config) = Config::standard() {
            let _ = DirectiveGenerator::new(&config)
                .generate(&discovered, &existing, config.open_date())
                .render();

            let mut fields = s.splitn(5, '\n');
            let bank = fields.next().unwrap_or_default();
            let payee = fields.next().unwrap_or_default();
            let explanation = fields.next().unwrap_or_default();
            let txn_type = fields.next().unwrap_or_default();
            let counterparty = fields.next().unwrap_or_default();
            let classifier =
                Classifier::new(&config).with_fee_hook(bank, KeywordFees::for_bank(bank));
            for direction in [Direction::Debit, Direction::Credit] {
                let txn = Transaction::new(direction)
                    .payee(payee)
                    .explanation(explanation)
                    .txn_type(txn_type)
                    .counterparty(counterparty);
                let _ = classifier.classify(&txn, &BankContext::new(bank));
            }
        }
    }
});
