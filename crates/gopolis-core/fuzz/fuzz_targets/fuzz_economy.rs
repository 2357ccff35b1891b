#![no_main]
use arbitrary::Arbitrary;
use gopolis_core::economy::Economy;
use gopolis_core::id::Workplace;
use gopolis_core::test_utils::*;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    DoWork { agent: u8, workplace: u8 },
    GetGoods { shop: u8, tenths: u8 },
    GetProducts { plant: u8, tenths: u8 },
    RemoveWorker { agent: u8, workplace: u8 },
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    gophers: u8,
    residentials: u8,
    commercials: u8,
    industrials: u8,
    capacity: u8,
    ops: Vec<FuzzOp>,
}

fuzz_target!(|input: FuzzInput| {
    let mut eco: Economy = town(
        (input.gophers % 64) as usize,
        (input.residentials % 16) as usize,
        (input.commercials % 8) as usize,
        (input.industrials % 8) as usize,
        (input.capacity % 8) as usize,
    );
    let agents = eco.agent_ids();
    let workplaces: Vec<Workplace> = eco.registry().workplaces().collect();
    let shops: Vec<_> = eco.registry().commercial_ids().collect();
    let plants: Vec<_> = eco.registry().industrial_ids().collect();

    // Limit operations to prevent timeouts.
    let max_ops = input.ops.len().min(200);

    for op in &input.ops[..max_ops] {
        match *op {
            FuzzOp::DoWork { .. } | FuzzOp::RemoveWorker { .. }
                if agents.is_empty() || workplaces.is_empty() => {}
            FuzzOp::DoWork { agent, workplace } => {
                let a = agents[agent as usize % agents.len()];
                let w = workplaces[workplace as usize % workplaces.len()];
                eco.do_work(w, a);
            }
            FuzzOp::RemoveWorker { agent, workplace } => {
                let a = agents[agent as usize % agents.len()];
                let w = workplaces[workplace as usize % workplaces.len()];
                eco.remove_worker(w, a);
            }
            FuzzOp::GetGoods { shop, tenths } => {
                if !shops.is_empty() {
                    eco.get_goods(shops[shop as usize % shops.len()], fixed(tenths as f64 / 10.0));
                }
            }
            FuzzOp::GetProducts { plant, tenths } => {
                if !plants.is_empty() {
                    eco.get_products(plants[plant as usize % plants.len()], fixed(tenths as f64 / 10.0));
                }
            }
        }
        assert_invariants(&eco);
    }
});
