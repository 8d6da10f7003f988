#![no_main]

use libfuzzer_sys::fuzz_target;
use steprun::{Config, Evaluator, Program, Realm};

const MAX_STEPS: usize = 100_000;

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    if source.len() > 10_000 {
        return;
    }

    // Input is an ESTree document; most mutations fail to decode
    let Ok(program) = Program::from_json(source) else {
        return;
    };

    let mut realm = Realm::with_config(Config::default().with_max_stack_depth(10_000));
    realm.set_parser(|text: &str| Program::from_json(text));
    let mut evaluator = Evaluator::with_realm(program, realm, None);

    // Step loop with timeout protection; errors are expected
    for _ in 0..MAX_STEPS {
        match evaluator.step() {
            Ok(true) => {}
            Ok(false) | Err(_) => break,
        }
    }
});
